/// HTML form binding and validation
///
/// A form turns raw request data into either cleaned values or a list of
/// `BoundField`s carrying the submitted values and their errors, which the
/// templates render field by field.
pub mod auth_forms;
pub mod comment_form;
pub mod post_form;

pub use auth_forms::{LoginForm, LoginInput, SignupForm, SignupInput};
pub use comment_form::{CommentForm, CommentInput};
pub use post_form::{CleanedPost, ImageChange, PostForm, PostInput, MAX_TEXT_PART_BYTES};

pub const MSG_REQUIRED: &str = "Обязательное поле.";
pub const MSG_TEXT_REQUIRED: &str = "Пожалуйста, заполните это поле";
pub const MSG_INVALID_CHOICE: &str =
    "Выберите корректный вариант. Вашего варианта нет среди допустимых значений.";
pub const MSG_INVALID_IMAGE: &str = "Загрузите правильное изображение. Файл, который вы загрузили, поврежден или не является изображением.";
pub const MSG_IMAGE_CONTRADICTION: &str =
    "Пожалуйста, загрузите файл или поставьте флажок \"Очистить\", но не оба.";

/// How a field is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Text,
    Email,
    Password,
    Textarea,
    Select,
    ClearableFile,
}

impl Widget {
    /// `type` attribute for `<input>` widgets.
    pub fn input_type(&self) -> &'static str {
        match self {
            Widget::Email => "email",
            Widget::Password => "password",
            Widget::ClearableFile => "file",
            _ => "text",
        }
    }

    pub fn is_textarea(&self) -> bool {
        matches!(self, Widget::Textarea)
    }

    pub fn is_select(&self) -> bool {
        matches!(self, Widget::Select)
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Widget::ClearableFile)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A field together with the value it currently shows and its errors.
#[derive(Debug, Clone)]
pub struct BoundField {
    pub name: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub value: String,
    pub choices: Vec<Choice>,
    pub required: bool,
    pub help_text: &'static str,
    pub errors: Vec<String>,
    /// For file fields: URL of the file already stored.
    pub current_url: Option<String>,
}

impl BoundField {
    pub fn new(name: &'static str, label: &'static str, widget: Widget) -> Self {
        Self {
            name,
            label,
            widget,
            value: String::new(),
            choices: Vec::new(),
            required: false,
            help_text: "",
            errors: Vec::new(),
            current_url: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help(mut self, text: &'static str) -> Self {
        self.help_text = text;
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn id(&self) -> String {
        format!("id_{}", self.name)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// CSS class for the widget; invalid fields get `is-invalid` as well.
    pub fn css_class(&self) -> &'static str {
        if self.has_errors() {
            "form-control is-invalid"
        } else {
            "form-control"
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.value == value
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

/// Fields plus errors not tied to a single field.
#[derive(Debug, Clone, Default)]
pub struct BoundForm {
    pub fields: Vec<BoundField>,
    pub non_field_errors: Vec<String>,
}

impl BoundForm {
    pub fn new(fields: Vec<BoundField>) -> Self {
        Self {
            fields,
            non_field_errors: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&BoundField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut BoundField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn add_error(&mut self, name: &str, message: impl Into<String>) {
        match self.field_mut(name) {
            Some(field) => field.add_error(message),
            None => self.non_field_errors.push(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.non_field_errors.is_empty() && self.fields.iter().all(|f| !f.has_errors())
    }

    pub fn errors_for(&self, name: &str) -> Vec<String> {
        self.field(name).map(|f| f.errors.clone()).unwrap_or_default()
    }
}
