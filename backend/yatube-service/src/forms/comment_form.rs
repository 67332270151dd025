use serde::Deserialize;

use super::{BoundField, BoundForm, Widget, MSG_REQUIRED};

#[derive(Debug, Default, Deserialize)]
pub struct CommentInput {
    #[serde(default)]
    pub text: String,
}

/// Comment form shown under a post: a single `text` field.
pub struct CommentForm;

impl CommentForm {
    fn fields(text: &str) -> BoundForm {
        BoundForm::new(vec![BoundField::new(
            "text",
            "Текст комментария",
            Widget::Textarea,
        )
        .required()
        .help("Введите текст комментария")
        .value(text)])
    }

    pub fn unbound() -> BoundForm {
        Self::fields("")
    }

    /// The trimmed comment text, or the form with errors.
    pub fn clean(input: CommentInput) -> Result<String, BoundForm> {
        let text = input.text.trim().to_string();
        if text.is_empty() {
            let mut form = Self::fields(&input.text);
            form.add_error("text", MSG_REQUIRED);
            return Err(form);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_text_is_required() {
        let form = CommentForm::clean(CommentInput { text: " \n".into() }).unwrap_err();
        assert_eq!(form.errors_for("text"), vec![MSG_REQUIRED.to_string()]);
        assert_eq!(form.field("text").unwrap().label, "Текст комментария");
    }

    #[test]
    fn comment_text_is_trimmed() {
        let text = CommentForm::clean(CommentInput {
            text: "  nice post ".into(),
        })
        .unwrap();
        assert_eq!(text, "nice post");
    }
}
