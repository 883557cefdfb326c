use uuid::Uuid;
use vg_types::Identity;

use crate::metadata::Metadata;
use crate::method::MethodDescriptor;

/// Per-call execution context.
///
/// Created once when a call opens and threaded through every step of its
/// handler. `identity` is only ever set by the auth interceptor after it has
/// verified a bearer token; handlers read it and never write it.
#[derive(Clone, Debug)]
pub struct CallContext {
    call_id: Uuid,
    method: &'static MethodDescriptor,
    metadata: Metadata,
    identity: Option<Identity>,
}

impl CallContext {
    pub fn new(method: &'static MethodDescriptor, metadata: Metadata) -> Self {
        Self {
            call_id: Uuid::now_v7(),
            method,
            metadata,
            identity: None,
        }
    }

    /// Derive a context carrying a verified identity.
    pub fn authenticated(self, identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            ..self
        }
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn method(&self) -> &'static MethodDescriptor {
        self.method
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The verified identity, if the call passed authentication.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::methods;
    use vg_types::UserId;

    fn upload() -> &'static MethodDescriptor {
        MethodDescriptor::lookup(methods::UPLOAD_VIDEO).unwrap()
    }

    #[test]
    fn new_context_is_anonymous() {
        let ctx = CallContext::new(upload(), Metadata::new());
        assert!(ctx.identity().is_none());
        assert_eq!(ctx.method().name, "UploadVideo");
    }

    #[test]
    fn authenticated_keeps_call_id_and_metadata() {
        let ctx = CallContext::new(upload(), Metadata::new().with("user-name", "hint"));
        let call_id = ctx.call_id();
        let alice = Identity::new(UserId::sequential(1), "alice");
        let ctx = ctx.authenticated(alice.clone());
        assert_eq!(ctx.call_id(), call_id);
        assert_eq!(ctx.identity(), Some(&alice));
        assert_eq!(ctx.metadata().get("user-name"), Some("hint"));
    }

    #[test]
    fn call_ids_are_unique() {
        let a = CallContext::new(upload(), Metadata::new());
        let b = CallContext::new(upload(), Metadata::new());
        assert_ne!(a.call_id(), b.call_id());
    }
}
