use std::sync::Arc;
use tracing::{debug, trace};

use crate::api::types::{UserInfoDto, UserResponse};
use crate::error::AppResult;
use crate::models::{CurrentUser, UserInfo};
use crate::services::UserService;

pub struct UserFacade {
    users: Arc<dyn UserService>,
}

impl UserFacade {
    #[must_use]
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self { users }
    }

    #[must_use]
    pub fn get_user(&self, current: &CurrentUser) -> UserResponse {
        trace!(user_id = %current.id, "GetUser");

        UserResponse {
            username: current.username.clone(),
            info: UserInfoDto {
                firstname: current.profile.first_name.clone(),
                lastname: current.profile.last_name.clone(),
                email: current.profile.email.clone(),
            },
        }
    }

    pub async fn update_info(&self, current: &CurrentUser, req: UserInfoDto) -> AppResult<()> {
        debug!(user_id = %current.id, "UpdateInfo");

        let info = UserInfo {
            first_name: req.firstname,
            last_name: req.lastname,
            email: req.email,
        };
        self.users.update_info(current, info).await
    }
}
