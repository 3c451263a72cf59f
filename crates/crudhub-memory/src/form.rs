//! Forms that bind request parameters through the serde representation of
//! their data and validate with `validator`.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::debug;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{CrudObject, Form, FormFactory};
use crudhub_core::types::{CrudRequest, FilterData, FormType, FormView};

/// Error recorded when a submitted value does not fit its field.
pub const INVALID_VALUE: &str = "This value is not valid.";

/// A form over any serde + `validator` data type.
///
/// Each declared field is read from the parameters matching the form's
/// method and converted to the JSON type the field currently holds:
/// booleans are checkbox style (absent means `false`), numbers are parsed,
/// and unset fields take whichever of text or number the data type accepts.
pub struct JsonForm<T> {
    form_type: FormType,
    data: T,
    submitted: bool,
    clicked: Vec<String>,
    errors: BTreeMap<String, Vec<String>>,
}

impl<T> JsonForm<T>
where
    T: Serialize + DeserializeOwned + Validate + Send + 'static,
{
    /// Creates an unsubmitted form of `form_type` over `data`.
    pub fn new(form_type: FormType, data: T) -> Self {
        Self {
            form_type,
            data,
            submitted: false,
            clicked: Vec::new(),
            errors: BTreeMap::new(),
        }
    }

    /// Field errors recorded by the last submission.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    fn bind(&mut self, params: &BTreeMap<String, String>) -> AppResult<()> {
        let mut value = serde_json::to_value(&self.data)?;
        let Some(map) = value.as_object_mut() else {
            return Err(AppError::configuration(format!(
                "Form {} needs data that serializes to a map",
                self.form_type.name
            )));
        };

        let mut failed = Vec::new();
        let mut untyped = Vec::new();
        for field in &self.form_type.fields {
            let current = map.get(field).cloned().unwrap_or(Value::Null);
            let raw = params.get(field).map(String::as_str);
            match convert(&current, raw) {
                Binding::Keep => {}
                Binding::Set(bound) => {
                    map.insert(field.clone(), bound);
                }
                Binding::Untyped(text) => {
                    map.insert(field.clone(), Value::String(text.to_string()));
                    untyped.push((field.clone(), text.to_string()));
                }
                Binding::Invalid => failed.push(field.clone()),
            }
        }

        let data = match serde_json::from_value::<T>(value.clone()) {
            Ok(data) => Some(data),
            Err(_) if !untyped.is_empty() => retry_as_numbers(value, &untyped),
            Err(e) => {
                debug!(form = %self.form_type.name, error = %e, "Bound data rejected");
                None
            }
        };

        for field in failed {
            self.add_error(&field, INVALID_VALUE);
        }
        match data {
            Some(data) => self.data = data,
            None => self.add_error("", INVALID_VALUE),
        }
        Ok(())
    }

    fn validate_data(&mut self) {
        if let Err(errors) = self.data.validate() {
            for (field, messages) in flatten_errors("", &errors) {
                for message in messages {
                    self.add_error(&field, message);
                }
            }
        }
    }
}

impl<T> Form<T> for JsonForm<T>
where
    T: Serialize + DeserializeOwned + Validate + Send + 'static,
{
    fn name(&self) -> &str {
        &self.form_type.name
    }

    fn handle_request(&mut self, request: &CrudRequest) -> AppResult<()> {
        if request.method != self.form_type.method {
            return Ok(());
        }
        let params = request.parameters_for(&self.form_type.method);
        self.errors.clear();
        self.clicked = self
            .form_type
            .buttons
            .iter()
            .filter(|button| params.contains_key(button.as_str()))
            .cloned()
            .collect();
        self.bind(params)?;
        self.validate_data();
        self.submitted = true;
        debug!(
            form = %self.form_type.name,
            errors = self.errors.len(),
            "Handled form submission"
        );
        Ok(())
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    fn is_valid(&self) -> bool {
        self.submitted && self.errors.is_empty()
    }

    fn is_clicked(&self, button: &str) -> AppResult<bool> {
        if !self.form_type.has_button(button) {
            return Err(AppError::configuration(format!(
                "Form {} has no button named {button}",
                self.form_type.name
            )));
        }
        Ok(self.clicked.iter().any(|b| b == button))
    }

    fn data(&self) -> &T {
        &self.data
    }

    fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    fn into_data(self: Box<Self>) -> T {
        self.data
    }

    fn create_view(&self) -> AppResult<FormView> {
        let data = serde_json::to_value(&self.data)?;
        let values: Map<String, Value> = self
            .form_type
            .fields
            .iter()
            .map(|field| {
                (
                    field.clone(),
                    data.get(field).cloned().unwrap_or(Value::Null),
                )
            })
            .collect();
        Ok(FormView {
            name: self.form_type.name.clone(),
            values,
            errors: self.errors.clone(),
            buttons: self.form_type.buttons.clone(),
            submitted: self.submitted,
            valid: self.is_valid(),
        })
    }
}

/// Builds [`JsonForm`]s for managed objects and list filters.
#[derive(Debug, Clone, Default)]
pub struct JsonFormFactory<E> {
    _entity: PhantomData<fn() -> E>,
}

impl<E: CrudObject> JsonFormFactory<E> {
    /// Creates a factory.
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<E: CrudObject> FormFactory<E> for JsonFormFactory<E> {
    fn create(&self, form_type: &FormType, data: E) -> AppResult<Box<dyn Form<E>>> {
        Ok(Box::new(JsonForm::new(form_type.clone(), data)))
    }

    fn create_filter(
        &self,
        form_type: &FormType,
        data: FilterData,
    ) -> AppResult<Box<dyn Form<FilterData>>> {
        Ok(Box::new(JsonForm::new(form_type.clone(), data)))
    }
}

enum Binding<'a> {
    Keep,
    Set(Value),
    Untyped(&'a str),
    Invalid,
}

fn convert<'a>(current: &Value, raw: Option<&'a str>) -> Binding<'a> {
    match (current, raw) {
        (Value::Bool(_), raw) => Binding::Set(Value::Bool(
            raw.is_some_and(|r| !matches!(r, "" | "0" | "false" | "off")),
        )),
        (_, None) => Binding::Keep,
        (Value::Number(_), Some(r)) if r.trim().is_empty() => Binding::Set(Value::Null),
        (Value::Number(n), Some(r)) => match parse_number(r.trim(), n.is_f64()) {
            Some(number) => Binding::Set(Value::Number(number)),
            None => Binding::Invalid,
        },
        (Value::String(_), Some(r)) => Binding::Set(Value::String(r.to_string())),
        (Value::Null, Some("")) => Binding::Set(Value::Null),
        (Value::Null, Some(r)) => Binding::Untyped(r),
        (Value::Array(_) | Value::Object(_), Some(r)) => match serde_json::from_str(r) {
            Ok(parsed) => Binding::Set(parsed),
            Err(_) => Binding::Invalid,
        },
    }
}

fn parse_number(raw: &str, float: bool) -> Option<Number> {
    if !float {
        if let Ok(i) = raw.parse::<i64>() {
            return Some(Number::from(i));
        }
    }
    raw.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Second attempt for fields that had no value before binding: numbers
/// instead of text.
fn retry_as_numbers<T: DeserializeOwned>(mut value: Value, untyped: &[(String, String)]) -> Option<T> {
    let map = value.as_object_mut()?;
    for (field, text) in untyped {
        if let Some(number) = parse_number(text.trim(), false) {
            map.insert(field.clone(), Value::Number(number));
        }
    }
    serde_json::from_value(value).ok()
}

fn flatten_errors(prefix: &str, errors: &ValidationErrors) -> Vec<(String, Vec<String>)> {
    let mut flat = Vec::new();
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                flat.push((path, messages));
            }
            ValidationErrorsKind::Struct(nested) => flat.extend(flatten_errors(&path, nested)),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flat.extend(flatten_errors(&format!("{path}[{index}]"), nested));
                }
            }
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
    struct Article {
        id: Option<i64>,
        #[validate(length(min = 3, message = "Title is too short"))]
        title: String,
        rating: f64,
        views: i64,
        published: bool,
        author_id: Option<i64>,
    }

    fn form_type() -> FormType {
        FormType::new("article")
            .field("title")
            .field("rating")
            .field("views")
            .field("published")
            .field("author_id")
            .button("save")
    }

    fn form(article: Article) -> Box<dyn Form<Article>> {
        JsonFormFactory::<Article>::new()
            .create(&form_type(), article)
            .unwrap()
    }

    #[test]
    fn test_get_request_does_not_submit() {
        let mut form = form(Article::default());
        form.handle_request(&CrudRequest::get("/articles/new")).unwrap();
        assert!(!form.is_submitted());
        assert!(!form.is_valid());
    }

    #[test]
    fn test_binds_typed_fields() {
        let mut form = form(Article {
            published: true,
            ..Article::default()
        });
        let request = CrudRequest::post("/articles/new")
            .with_field("title", "Ownership")
            .with_field("rating", "4.5")
            .with_field("views", "12")
            .with_field("author_id", "3")
            .with_field("save", "");
        form.handle_request(&request).unwrap();

        assert!(form.is_submitted());
        assert!(form.is_valid());
        assert!(form.is_clicked("save").unwrap());
        let article = form.into_data();
        assert_eq!(article.title, "Ownership");
        assert_eq!(article.rating, 4.5);
        assert_eq!(article.views, 12);
        assert_eq!(article.author_id, Some(3));
        assert!(!article.published);
    }

    #[test]
    fn test_validation_errors_reach_the_view() {
        let mut form = form(Article::default());
        let request = CrudRequest::post("/articles/new").with_field("title", "ab");
        form.handle_request(&request).unwrap();

        assert!(form.is_submitted());
        assert!(!form.is_valid());
        assert!(!form.is_clicked("save").unwrap());
        let view = form.create_view().unwrap();
        assert_eq!(
            view.errors.get("title"),
            Some(&vec!["Title is too short".to_string()])
        );
        assert_eq!(view.values.get("title"), Some(&json!("ab")));
    }

    #[test]
    fn test_unparsable_number_is_field_error() {
        let mut form = form(Article::default());
        let request = CrudRequest::post("/articles/new")
            .with_field("title", "Lifetimes")
            .with_field("views", "many");
        form.handle_request(&request).unwrap();
        assert!(!form.is_valid());
        assert_eq!(
            form.create_view().unwrap().errors.get("views"),
            Some(&vec![INVALID_VALUE.to_string()])
        );
    }

    #[test]
    fn test_unknown_button_is_configuration_error() {
        let form = form(Article::default());
        assert!(form.is_clicked("publish").is_err());
    }

    #[test]
    fn test_filter_form_reads_query_on_get() {
        let filter_type = FormType::new("filter")
            .with_method(Method::GET)
            .field("title")
            .field("published");
        let mut form = JsonFormFactory::<Article>::new()
            .create_filter(&filter_type, FilterData::default())
            .unwrap();
        let request = CrudRequest::get("/articles")
            .with_query("title", "rust")
            .with_query("page", "2");
        form.handle_request(&request).unwrap();

        assert!(form.is_valid());
        let data = form.into_data();
        assert_eq!(data.get("title"), Some(&json!("rust")));
        assert_eq!(data.get("published"), None);
        assert_eq!(data.get("page"), None);
    }
}
