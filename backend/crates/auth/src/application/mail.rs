//! Email copy

use std::time::Duration;

use crate::application::config::minutes;
use crate::domain::entity::user::User;
use crate::domain::mailer::EmailMessage;

pub(crate) fn verification_code(user: &User, code: &str, ttl: Duration) -> EmailMessage {
    let minutes = minutes(ttl);
    EmailMessage {
        to: user.email.clone(),
        subject: format!("Your email verification code (valid for {minutes} min)"),
        text: format!(
            "Hi {},\n\nWelcome to Natours! Your verification code is {code}\n\n\
             It expires in {minutes} minutes. If you did not sign up, please ignore this email.",
            user.name
        ),
    }
}

pub(crate) fn password_reset(user: &User, reset_url: &str, ttl: Duration) -> EmailMessage {
    let minutes = minutes(ttl);
    EmailMessage {
        to: user.email.clone(),
        subject: format!("Your password reset token (valid for {minutes} min)"),
        text: format!(
            "Hi {},\n\nForgot your password? Submit a PATCH request with your new password \
             and passwordConfirm to: {reset_url}\n\n\
             If you didn't forget your password, please ignore this email.",
            user.name
        ),
    }
}
