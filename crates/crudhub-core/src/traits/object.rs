//! Bounds every managed object type satisfies.

use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

/// A managed domain object the controller can create, bind, and render.
///
/// `Default` is the zero-argument construction used by the default create
/// factory; `Validate` is consulted by form implementations after binding.
pub trait CrudObject:
    Serialize + DeserializeOwned + Validate + Default + Clone + Send + Sync + 'static
{
}

impl<T> CrudObject for T where
    T: Serialize + DeserializeOwned + Validate + Default + Clone + Send + Sync + 'static
{
}
