//! OAuth provider clients.

mod github;

pub use github::{
    GITHUB_AUTH_URL, GITHUB_TOKEN_URL, GITHUB_USER_API_URL, GithubConfig, GithubProvider,
};
