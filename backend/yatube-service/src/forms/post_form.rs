use actix_multipart::Multipart;
use futures_util::StreamExt;

use super::{
    BoundField, BoundForm, Choice, Widget, MSG_IMAGE_CONTRADICTION, MSG_INVALID_CHOICE,
    MSG_INVALID_IMAGE, MSG_TEXT_REQUIRED,
};
use crate::error::{AppError, Result};
use crate::media::{inspect_image, UploadedImage};
use crate::models::{media_url, Group, Post};

/// Upper bound for the non-file parts of the form, and for urlencoded forms.
pub const MAX_TEXT_PART_BYTES: usize = 256 * 1024;

/// Raw post form submission.
#[derive(Debug, Default)]
pub struct PostInput {
    pub group: Option<String>,
    pub text: String,
    pub image: Option<Vec<u8>>,
    pub image_too_large: bool,
    pub image_clear: bool,
}

impl PostInput {
    /// Read a `multipart/form-data` body. An oversized image is drained and
    /// flagged rather than failing the request so the form can report it.
    pub async fn from_multipart(mut payload: Multipart, max_upload_bytes: usize) -> Result<Self> {
        let mut input = PostInput::default();

        while let Some(field) = payload.next().await {
            let mut field = field?;
            let name = field.name().unwrap_or_default().to_string();
            let limit = if name == "image" {
                max_upload_bytes
            } else {
                MAX_TEXT_PART_BYTES
            };

            let mut data = Vec::new();
            let mut overflow = false;
            while let Some(chunk) = field.next().await {
                let chunk = chunk?;
                if overflow || data.len() + chunk.len() > limit {
                    overflow = true;
                    continue;
                }
                data.extend_from_slice(&chunk);
            }

            if overflow && name != "image" {
                return Err(AppError::BadRequest(format!(
                    "Form field {} is too large",
                    name
                )));
            }

            match name.as_str() {
                "group" => input.group = Some(String::from_utf8_lossy(&data).into_owned()),
                "text" => input.text = String::from_utf8_lossy(&data).into_owned(),
                "image" if overflow => input.image_too_large = true,
                "image" if !data.is_empty() => input.image = Some(data),
                "image-clear" => input.image_clear = true,
                _ => {}
            }
        }

        Ok(input)
    }
}

/// What to do with the post's image on save.
#[derive(Debug, Clone)]
pub enum ImageChange {
    Keep,
    Clear,
    Replace(UploadedImage),
}

#[derive(Debug, Clone)]
pub struct CleanedPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: ImageChange,
}

/// Create/edit form for a post: `group`, `text`, `image`.
pub struct PostForm;

impl PostForm {
    fn fields(groups: &[Group], group: &str, text: &str, current_image: Option<&str>) -> BoundForm {
        let mut choices = vec![Choice::new("", "---------")];
        choices.extend(
            groups
                .iter()
                .map(|g| Choice::new(g.id.to_string(), g.title.clone())),
        );

        let mut image = BoundField::new("image", "Изображение", Widget::ClearableFile)
            .help("Загрузите картинку");
        image.current_url = current_image.map(media_url);

        BoundForm::new(vec![
            BoundField::new("group", "Сообщество", Widget::Select)
                .help("Выберите группу")
                .choices(choices)
                .value(group),
            BoundField::new("text", "Текст записи", Widget::Textarea)
                .required()
                .help("Введите текст")
                .value(text),
            image,
        ])
    }

    /// Empty form, or one pre-filled from an existing post.
    pub fn unbound(groups: &[Group], post: Option<&Post>) -> BoundForm {
        match post {
            Some(post) => Self::fields(
                groups,
                &post.group_id.map(|id| id.to_string()).unwrap_or_default(),
                &post.text,
                post.image.as_deref(),
            ),
            None => Self::fields(groups, "", "", None),
        }
    }

    /// Validate a submission against the known groups.
    pub async fn clean(
        input: PostInput,
        groups: &[Group],
        current_image: Option<&str>,
        max_upload_bytes: usize,
    ) -> std::result::Result<CleanedPost, BoundForm> {
        let raw_group = input.group.clone().unwrap_or_default();
        let mut form = Self::fields(groups, &raw_group, &input.text, current_image);

        let group_id = match raw_group.trim() {
            "" => None,
            value => match value.parse::<i64>() {
                Ok(id) if groups.iter().any(|g| g.id == id) => Some(id),
                _ => {
                    form.add_error("group", MSG_INVALID_CHOICE);
                    None
                }
            },
        };

        let text = input.text.trim().to_string();
        if text.is_empty() {
            form.add_error("text", MSG_TEXT_REQUIRED);
        }

        let image = if input.image_too_large {
            form.add_error(
                "image",
                format!(
                    "Убедитесь, что размер файла не превышает {} МБ.",
                    max_upload_bytes / (1024 * 1024)
                ),
            );
            ImageChange::Keep
        } else if input.image.is_some() && input.image_clear {
            form.add_error("image", MSG_IMAGE_CONTRADICTION);
            ImageChange::Keep
        } else if let Some(bytes) = input.image {
            match inspect_image(bytes).await {
                Some(image) => ImageChange::Replace(image),
                None => {
                    form.add_error("image", MSG_INVALID_IMAGE);
                    ImageChange::Keep
                }
            }
        } else if input.image_clear {
            ImageChange::Clear
        } else {
            ImageChange::Keep
        };

        if form.is_valid() {
            Ok(CleanedPost {
                text,
                group_id,
                image,
            })
        } else {
            Err(form)
        }
    }
}
