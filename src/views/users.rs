use super::sequencer::{Loader, ViewState};
use crate::api::users::{self, DirectoryUser};
use crate::api::ApiClient;

pub const USERS_LOAD_FAILED: &str = "Could not load users.";

pub struct UsersView {
    api: ApiClient,
    loader: Loader<Vec<DirectoryUser>>,
}

impl UsersView {
    pub fn new(api: ApiClient) -> Self {
        Self { api, loader: Loader::new(USERS_LOAD_FAILED) }
    }

    pub async fn load(&self) -> bool {
        self.loader.load(users::list(&self.api)).await
    }

    pub fn state(&self) -> ViewState<Vec<DirectoryUser>> { self.loader.state() }
}
