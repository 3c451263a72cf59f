//! Form capabilities: binding request input to data and validating it.

use crate::result::AppResult;
use crate::traits::object::CrudObject;
use crate::types::filter::FilterData;
use crate::types::form::{FormType, FormView};
use crate::types::request::CrudRequest;

/// A form bound to data of type `T`.
pub trait Form<T>: Send {
    /// Form name.
    fn name(&self) -> &str;

    /// Bind the request parameters the form reads onto its data.
    fn handle_request(&mut self, request: &CrudRequest) -> AppResult<()>;

    /// Whether request data has been bound.
    fn is_submitted(&self) -> bool;

    /// Whether the bound data is valid. `false` before submission.
    fn is_valid(&self) -> bool;

    /// Whether submit button `button` was clicked.
    ///
    /// Fails with a configuration error when the form has no such button.
    fn is_clicked(&self, button: &str) -> AppResult<bool>;

    /// The bound data.
    fn data(&self) -> &T;

    /// Mutable access to the bound data.
    fn data_mut(&mut self) -> &mut T;

    /// Consume the form, returning its data.
    fn into_data(self: Box<Self>) -> T;

    /// Template-facing snapshot.
    fn create_view(&self) -> AppResult<FormView>;
}

/// Creates forms for managed objects and for list filters.
pub trait FormFactory<E: CrudObject>: Send + Sync {
    /// Create a form of `form_type` bound to `data`.
    fn create(&self, form_type: &FormType, data: E) -> AppResult<Box<dyn Form<E>>>;

    /// Create a list filter form of `form_type` bound to `data`.
    fn create_filter(
        &self,
        form_type: &FormType,
        data: FilterData,
    ) -> AppResult<Box<dyn Form<FilterData>>>;
}
