use async_trait::async_trait;

const DEMO_STUDENT_ID: &str = "403472";
const DEMO_PASSWORD: &str = "demo123";

/// Credential check behind the login form.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, student_id: &str, password: &str) -> bool;
}

/// Accepts a single built-in demo account.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoIdentityProvider;

#[async_trait]
impl IdentityProvider for DemoIdentityProvider {
    async fn authenticate(&self, student_id: &str, password: &str) -> bool {
        student_id == DEMO_STUDENT_ID && password == DEMO_PASSWORD
    }
}
