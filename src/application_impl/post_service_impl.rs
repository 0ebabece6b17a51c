use crate::application_port::PostService;
use crate::domain_model::Post;

/// Posts served from a fixed in-memory list.
pub struct InMemoryPostService {
    posts: Vec<Post>,
}

impl InMemoryPostService {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn with_sample_posts() -> Self {
        Self::new(vec![
            Post {
                username: "Kyle".to_string(),
                title: "Post 1".to_string(),
            },
            Post {
                username: "Jim".to_string(),
                title: "Post 2".to_string(),
            },
        ])
    }
}

#[async_trait::async_trait]
impl PostService for InMemoryPostService {
    async fn list_for(&self, username: &str) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|post| post.username == username)
            .cloned()
            .collect()
    }
}
