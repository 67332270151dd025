use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::{BoundField, BoundForm, Widget, MSG_REQUIRED};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));

pub const MSG_BAD_USERNAME: &str = "Введите правильное имя пользователя. Оно может содержать только буквы, цифры и знаки @/./+/-/_.";
pub const MSG_USERNAME_TAKEN: &str = "Пользователь с таким именем уже существует.";
pub const MSG_BAD_CREDENTIALS: &str = "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct SignupInput {
    #[serde(default)]
    #[validate(length(max = 150, message = "Не более 150 символов."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Не более 150 символов."))]
    pub last_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Не более 150 символов."))]
    pub username: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Введите правильный адрес электронной почты."))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "Введённый пароль слишком короткий. Он должен содержать как минимум 8 символов."
    ))]
    pub password1: String,

    #[serde(default)]
    #[validate(must_match(other = "password1", message = "Введенные пароли не совпадают."))]
    pub password2: String,
}

/// Registration form.
pub struct SignupForm;

impl SignupForm {
    fn fields(input: &SignupInput) -> BoundForm {
        BoundForm::new(vec![
            BoundField::new("first_name", "Имя", Widget::Text).value(input.first_name.as_str()),
            BoundField::new("last_name", "Фамилия", Widget::Text).value(input.last_name.as_str()),
            BoundField::new("username", "Имя пользователя", Widget::Text)
                .required()
                .help("Обязательное поле. Не более 150 символов. Только буквы, цифры и символы @/./+/-/_.")
                .value(input.username.as_str()),
            BoundField::new("email", "Адрес электронной почты", Widget::Email)
                .value(input.email.clone().unwrap_or_default()),
            BoundField::new("password1", "Пароль", Widget::Password)
                .required()
                .help("Пароль должен содержать как минимум 8 символов."),
            BoundField::new("password2", "Подтверждение пароля", Widget::Password)
                .required()
                .help("Для подтверждения введите, пожалуйста, пароль ещё раз."),
        ])
    }

    pub fn unbound() -> BoundForm {
        Self::fields(&SignupInput::default())
    }

    /// Bound form carrying a username that turned out to be taken.
    pub fn username_taken(input: &SignupInput) -> BoundForm {
        let mut form = Self::fields(input);
        form.add_error("username", MSG_USERNAME_TAKEN);
        form
    }

    /// Syntactic validation; username uniqueness is checked against the
    /// database by the caller.
    pub fn clean(mut input: SignupInput) -> Result<SignupInput, BoundForm> {
        input.username = input.username.trim().to_string();
        input.first_name = input.first_name.trim().to_string();
        input.last_name = input.last_name.trim().to_string();

        let mut form = Self::fields(&input);

        for (name, value) in [
            ("username", &input.username),
            ("password1", &input.password1),
            ("password2", &input.password2),
        ] {
            if value.is_empty() {
                form.add_error(name, MSG_REQUIRED);
            }
        }

        if !input.username.is_empty() && !USERNAME_RE.is_match(&input.username) {
            form.add_error("username", MSG_BAD_USERNAME);
        }

        if let Err(errors) = input.validate() {
            for (field, field_errors) in errors.field_errors() {
                let name = field.to_string();
                if form.errors_for(&name).iter().any(|e| e == MSG_REQUIRED) {
                    continue;
                }
                for error in field_errors.iter() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| error.code.to_string());
                    form.add_error(&name, message);
                }
            }
        }

        if form.is_valid() {
            Ok(input)
        } else {
            Err(form)
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Where to go after signing in.
    #[serde(default)]
    pub next: String,
}

/// Sign-in form.
pub struct LoginForm;

impl LoginForm {
    fn fields(username: &str) -> BoundForm {
        BoundForm::new(vec![
            BoundField::new("username", "Имя пользователя", Widget::Text)
                .required()
                .value(username),
            BoundField::new("password", "Пароль", Widget::Password).required(),
        ])
    }

    pub fn unbound() -> BoundForm {
        Self::fields("")
    }

    /// Wrong username or password; reported once for the whole form.
    pub fn invalid_credentials(username: &str) -> BoundForm {
        let mut form = Self::fields(username);
        form.non_field_errors.push(MSG_BAD_CREDENTIALS.to_string());
        form
    }

    pub fn clean(input: LoginInput) -> Result<LoginInput, BoundForm> {
        let username = input.username.trim().to_string();
        let mut form = Self::fields(&username);

        if username.is_empty() {
            form.add_error("username", MSG_REQUIRED);
        }
        if input.password.is_empty() {
            form.add_error("password", MSG_REQUIRED);
        }

        if form.is_valid() {
            Ok(LoginInput {
                username,
                password: input.password,
                next: input.next,
            })
        } else {
            Err(form)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, password1: &str, password2: &str) -> SignupInput {
        SignupInput {
            username: username.into(),
            password1: password1.into(),
            password2: password2.into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_signup() {
        let mut input = signup(" new.user ", "correct horse", "correct horse");
        input.email = Some("user@example.com".into());
        let cleaned = SignupForm::clean(input).unwrap();
        assert_eq!(cleaned.username, "new.user");
    }

    #[test]
    fn required_fields() {
        let form = SignupForm::clean(signup("", "", "")).unwrap_err();
        assert_eq!(form.errors_for("username"), vec![MSG_REQUIRED.to_string()]);
        assert_eq!(form.errors_for("password1"), vec![MSG_REQUIRED.to_string()]);
        assert_eq!(form.errors_for("password2"), vec![MSG_REQUIRED.to_string()]);
    }

    #[test]
    fn username_characters_are_restricted() {
        let form = SignupForm::clean(signup("bad name!", "password123", "password123")).unwrap_err();
        assert_eq!(form.errors_for("username"), vec![MSG_BAD_USERNAME.to_string()]);
    }

    #[test]
    fn password_rules() {
        let form = SignupForm::clean(signup("user", "short", "short")).unwrap_err();
        assert_eq!(form.errors_for("password1").len(), 1);

        let form = SignupForm::clean(signup("user", "password123", "password124")).unwrap_err();
        assert_eq!(form.errors_for("password2").len(), 1);
        assert!(form.errors_for("password1").is_empty());
    }

    #[test]
    fn email_is_optional_but_checked() {
        assert!(SignupForm::clean(signup("user", "password123", "password123")).is_ok());

        let mut input = signup("user", "password123", "password123");
        input.email = Some("not-an-email".into());
        let form = SignupForm::clean(input).unwrap_err();
        assert_eq!(form.errors_for("email").len(), 1);
    }

    #[test]
    fn blank_email_deserializes_to_none() {
        let input: SignupInput = serde_json::from_str(r#"{"username":"u","email":"  "}"#).unwrap();
        assert!(input.email.is_none());
    }

    #[test]
    fn login_requires_both_fields() {
        let form = LoginForm::clean(LoginInput::default()).unwrap_err();
        assert_eq!(form.errors_for("username"), vec![MSG_REQUIRED.to_string()]);
        assert_eq!(form.errors_for("password"), vec![MSG_REQUIRED.to_string()]);

        let form = LoginForm::invalid_credentials("leo");
        assert_eq!(form.non_field_errors, vec![MSG_BAD_CREDENTIALS.to_string()]);
        assert_eq!(form.field("username").unwrap().value, "leo");
    }
}
