use serde::{Deserialize, Serialize};

/// Identity attributes carried inside a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
}

impl Claims {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
