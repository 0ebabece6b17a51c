use crate::domain_model::Post;

#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    async fn list_for(&self, username: &str) -> Vec<Post>;
}
