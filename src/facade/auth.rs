use std::sync::Arc;
use tracing::{debug, error};

use crate::api::types::{
    ActivateRequest, ReplacePasswordRequest, SigninRequest, SigninResponse, SignupRequest,
    TOKEN_TYPE_BEARER, UsernameRequest,
};
use crate::domain::mask;
use crate::error::{AppError, AppResult};
use crate::mail::MailNotifier;
use crate::models::{NewUser, User};
use crate::services::{AuthService, OtpService, UserService};

/// The six account flows: signin, signup, activate, resend, reset, replace.
pub struct AuthFacade {
    auth: Arc<dyn AuthService>,
    otp: Arc<dyn OtpService>,
    users: Arc<dyn UserService>,
    mail: Arc<MailNotifier>,
}

impl AuthFacade {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthService>,
        otp: Arc<dyn OtpService>,
        users: Arc<dyn UserService>,
        mail: Arc<MailNotifier>,
    ) -> Self {
        Self {
            auth,
            otp,
            users,
            mail,
        }
    }

    pub async fn signin(&self, req: SigninRequest) -> AppResult<SigninResponse> {
        debug!(?req, "Signin");

        let grant = self.auth.signin(&req.username, &req.password).await?;
        Ok(SigninResponse {
            access_token: grant.access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: grant.expires_in,
            refresh_token: String::new(),
        })
    }

    /// Creates the account, then mails the activation code. A mail failure
    /// is reported but the account stays persisted.
    pub async fn signup(&self, req: SignupRequest) -> AppResult<()> {
        debug!(?req, "Signup");

        let user = self
            .auth
            .signup(NewUser {
                username: req.username,
                password: req.password,
                first_name: req.firstname,
                last_name: req.lastname,
            })
            .await?;

        self.send_activation_mail(&user.username).await
    }

    pub async fn activate(&self, req: ActivateRequest) -> AppResult<()> {
        debug!("Activate");

        let username = self.otp.validate_activation_otp(&req.otp)?;
        self.users.activate(&username).await
    }

    /// Succeeds whether or not the username is known.
    pub async fn resend(&self, req: UsernameRequest) -> AppResult<()> {
        debug!(?req, "Resend activation");

        let Some(user) = self.find_user(&req.username).await? else {
            return Ok(());
        };
        let sent = self.send_activation_mail(&user.username).await;
        Self::swallow_mail_failure(sent)
    }

    /// Succeeds whether or not the username is known.
    pub async fn reset(&self, req: UsernameRequest) -> AppResult<()> {
        debug!(?req, "Reset password");

        let Some(user) = self.find_user(&req.username).await? else {
            return Ok(());
        };
        let otp = self.otp.generate_reset_password_otp(&user.username)?;
        let sent = self
            .mail
            .send_reset_password_mail(&user.username, &otp)
            .await;
        Self::swallow_mail_failure(sent)
    }

    pub async fn replace(&self, req: ReplacePasswordRequest) -> AppResult<()> {
        debug!("Replace password");

        let username = self.otp.validate_reset_password_otp(&req.otp)?;
        self.users
            .update_password(&username, &req.new_password)
            .await
    }

    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        match self.users.get_user_by_username(username).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::NotFound { .. }) => {
                debug!(username = %mask(username), "No such user, nothing to send");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn send_activation_mail(&self, username: &str) -> AppResult<()> {
        let otp = self.otp.generate_activation_otp(username)?;
        self.mail.send_activation_mail(username, &otp).await
    }

    // Resend and reset always answer 200.
    fn swallow_mail_failure(result: AppResult<()>) -> AppResult<()> {
        match result {
            Err(AppError::SendMail(e)) => {
                error!(error = ?e, "Mail delivery failed");
                Ok(())
            }
            other => other,
        }
    }
}
