use std::fmt;
use std::sync::Arc;

use crate::auth::AuthorizationAdapter;
use crate::context::Context;
use crate::error::{AuthorizationError, Result};
use crate::fields::AuthorizedField;
use crate::model::Model;
use crate::value::WireMap;

/// A field's effective incoming handler, built once per field definition.
pub type IncomingHandler =
    Arc<dyn Fn(&dyn Context, &WireMap, &mut dyn Model) -> Result<()> + Send + Sync>;

/// Outcome of a successful write check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    /// The field has no permission attached; nothing was checked.
    Unguarded,
    /// The permission object approved the write.
    Authorized,
}

/// Authorization decorator for a field's incoming handler.
///
/// Each check moves through `unchecked -> authorized -> delegated`, or stops
/// at `denied`:
///
/// ```text
/// no permission      : unchecked -------------------------> delegated
/// permission grants  : unchecked --> authorized ----------> delegated
/// permission denies  : unchecked --> denied (AuthorizationError)
/// ```
///
/// A denied write never reaches the wrapped handler, so the target object
/// is left untouched.
pub struct Authorization<F> {
    adapter: Arc<dyn AuthorizationAdapter<F>>,
}

impl<F> Clone for Authorization<F> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
        }
    }
}

impl<F> fmt::Debug for Authorization<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("adapter", &self.adapter)
            .finish()
    }
}

impl<F: AuthorizedField> Authorization<F> {
    /// Creates a decorator that uses `adapter` unless the permission object
    /// supplies its own.
    pub fn new(adapter: impl AuthorizationAdapter<F> + 'static) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }

    /// Creates a decorator from a shared adapter.
    pub fn from_arc(adapter: Arc<dyn AuthorizationAdapter<F>>) -> Self {
        Self { adapter }
    }

    /// Checks whether the write of `source` onto `target` may proceed.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthorizationError`] naming the field if the permission
    /// denies the write, or whatever error the adapter hit while computing
    /// the compared values.
    pub fn check(
        &self,
        field: &F,
        ctx: &dyn Context,
        source: &WireMap,
        target: &dyn Model,
    ) -> Result<Clearance> {
        let Some(permission) = field.permission() else {
            tracing::trace!(
                request_id = %ctx.request_id(),
                field = %field.json_key(),
                "no permission attached, write unguarded"
            );
            return Ok(Clearance::Unguarded);
        };

        let adapter = permission.auth_adapter().unwrap_or(&*self.adapter);
        let triple = adapter.triple(field, ctx, source, target)?;

        if permission.is_write_authorized(ctx, target, &triple.source, &triple.target) {
            tracing::debug!(
                request_id = %ctx.request_id(),
                field = %triple.name,
                "write authorized"
            );
            Ok(Clearance::Authorized)
        } else {
            tracing::warn!(
                request_id = %ctx.request_id(),
                field = %triple.name,
                "write denied"
            );
            Err(AuthorizationError::new(triple.name).into())
        }
    }

    /// Folds the check into `handler`, producing the handler stored on the
    /// field.
    pub fn wrap<H>(self, field: Arc<F>, handler: H) -> IncomingHandler
    where
        H: Fn(&F, &dyn Context, &WireMap, &mut dyn Model) -> Result<()> + Send + Sync + 'static,
    {
        Arc::new(
            move |ctx: &dyn Context, source: &WireMap, target: &mut dyn Model| {
                self.check(&field, ctx, source, &*target)?;
                handler(&*field, ctx, source, target)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::auth::{AuthTriple, Permission, ScalarAdapter};
    use crate::context::Ctx;
    use crate::error::Error;
    use crate::fields::{FieldAdapter, PropertyField};
    use crate::model::Record;
    use crate::request::RequestMeta;
    use crate::value::{FieldType, Value};

    #[derive(Debug)]
    struct Fixed(bool);

    impl<F> Permission<F> for Fixed {
        fn is_write_authorized(
            &self,
            _ctx: &dyn Context,
            _target: &dyn Model,
            _source: &Value,
            _current: &Value,
        ) -> bool {
            self.0
        }
    }

    /// Always reports the same triple, counting invocations.
    #[derive(Debug, Default)]
    struct CountingAdapter(AtomicUsize);

    impl<F> AuthorizationAdapter<F> for CountingAdapter {
        fn triple(
            &self,
            _field: &F,
            _ctx: &dyn Context,
            _source: &WireMap,
            _target: &dyn Model,
        ) -> Result<AuthTriple> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(AuthTriple::new("counted", Value::Null, Value::Null))
        }
    }

    /// Grants writes but brings its own adapter.
    #[derive(Debug, Default)]
    struct WithOverride(CountingAdapter);

    impl Permission<PropertyField> for WithOverride {
        fn is_write_authorized(
            &self,
            _ctx: &dyn Context,
            _target: &dyn Model,
            _source: &Value,
            _current: &Value,
        ) -> bool {
            true
        }

        fn auth_adapter(&self) -> Option<&dyn AuthorizationAdapter<PropertyField>> {
            Some(&self.0)
        }
    }

    fn ctx() -> Ctx {
        Ctx::new(RequestMeta::new("req-decorator"))
    }

    fn source() -> WireMap {
        let mut map = WireMap::new();
        map.insert("count".to_string(), json!(5));
        map
    }

    #[test]
    fn unguarded_without_permission() {
        let field = PropertyField::new("count", FieldType::Int).expect("valid field");
        let target = Record::new().with("count", 1);
        let clearance = Authorization::<PropertyField>::new(ScalarAdapter)
            .check(&field, &ctx(), &source(), &target)
            .expect("no permission");
        assert_eq!(clearance, Clearance::Unguarded);
    }

    #[test]
    fn authorized_when_permission_grants() {
        let field = PropertyField::new("count", FieldType::Int)
            .expect("valid field")
            .with_permission(Fixed(true));
        let target = Record::new().with("count", 1);
        let clearance = Authorization::<PropertyField>::new(ScalarAdapter)
            .check(&field, &ctx(), &source(), &target)
            .expect("granted");
        assert_eq!(clearance, Clearance::Authorized);
    }

    #[test]
    fn denied_names_the_field() {
        let field = PropertyField::new("count", FieldType::Int)
            .expect("valid field")
            .with_json_property("total")
            .with_permission(Fixed(false));
        let target = Record::new().with("count", 1);
        let mut source = WireMap::new();
        source.insert("total".to_string(), json!(2));

        let err = Authorization::<PropertyField>::new(ScalarAdapter)
            .check(&field, &ctx(), &source, &target)
            .unwrap_err();
        assert_eq!(err, Error::Authorization(AuthorizationError::new("total")));
    }

    #[test]
    fn permission_adapter_overrides_default() {
        let field = PropertyField::new("count", FieldType::Int)
            .expect("valid field")
            .with_permission(WithOverride::default());
        let target = Record::new().with("count", 1);
        let default = Arc::new(CountingAdapter::default());

        Authorization::<PropertyField>::from_arc(default.clone())
            .check(&field, &ctx(), &source(), &target)
            .expect("granted");

        assert_eq!(default.0.load(Ordering::SeqCst), 0);
        let permission = field.permission().expect("attached");
        let overriding = permission.auth_adapter().expect("override");
        let triple = overriding
            .triple(&field, &ctx(), &source(), &target)
            .expect("triple");
        assert_eq!(triple.name, "counted");
    }

    #[test]
    fn wrapped_handler_runs_after_grant() {
        let field = Arc::new(
            PropertyField::new("count", FieldType::Int)
                .expect("valid field")
                .with_permission(Fixed(true)),
        );
        let handler = Authorization::<PropertyField>::new(ScalarAdapter)
            .wrap(field, PropertyField::handle_incoming);
        let mut target = Record::new().with("count", 1);
        handler(&ctx(), &source(), &mut target).expect("granted");
        assert_eq!(target.get("count"), Ok(Value::Int(5)));
    }

    #[test]
    fn wrapped_handler_skipped_after_denial() {
        let field = Arc::new(
            PropertyField::new("count", FieldType::Int)
                .expect("valid field")
                .with_permission(Fixed(false)),
        );
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler = Authorization::<PropertyField>::new(ScalarAdapter).wrap(
            field,
            move |field: &PropertyField, ctx: &dyn Context, source: &WireMap, target: &mut dyn Model| {
                seen.fetch_add(1, Ordering::SeqCst);
                field.handle_incoming(ctx, source, target)
            },
        );
        let mut target = Record::new().with("count", 1);
        assert!(handler(&ctx(), &source(), &mut target).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(target.get("count"), Ok(Value::Int(1)));
    }
}
