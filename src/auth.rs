use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub email: String,
}

// Repository operations assume an authenticated context has already been
// established by the shell; they perform no authorization checks themselves.
pub trait IdentityProvider: Send + Sync {
    fn current_principal(&self) -> Option<Principal>;
    fn sign_out(&self);
}

#[derive(Debug, Default)]
pub struct StaticIdentity {
    principal: Mutex<Option<Principal>>,
}

impl StaticIdentity {
    pub fn signed_in(principal: Principal) -> Self {
        Self {
            principal: Mutex::new(Some(principal)),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_principal(&self) -> Option<Principal> {
        self.principal
            .lock()
            .expect("identity mutex poisoned")
            .clone()
    }

    fn sign_out(&self) {
        self.principal
            .lock()
            .expect("identity mutex poisoned")
            .take();
    }
}
