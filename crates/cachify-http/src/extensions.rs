//! Type-keyed, request-scoped values
//!
//! Pipeline stages use this to hand helpers to later stages, for example the
//! asset tag renderer that templates call while rendering a page.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-safe extension storage
#[derive(Clone, Default)]
pub struct Extensions {
	map: Arc<RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Extensions {
	/// Create an empty extension map
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a value, replacing any previous value of the same type
	///
	/// # Examples
	///
	/// ```
	/// use cachify_http::Extensions;
	///
	/// let extensions = Extensions::new();
	/// extensions.insert(42u32);
	/// extensions.insert(7u32);
	/// assert_eq!(extensions.get::<u32>(), Some(7));
	/// ```
	pub fn insert<T: Send + Sync + 'static>(&self, value: T) {
		self.map.write().insert(TypeId::of::<T>(), Box::new(value));
	}

	/// Get a clone of the stored value of type `T`
	pub fn get<T>(&self) -> Option<T>
	where
		T: Clone + Send + Sync + 'static,
	{
		self.map
			.read()
			.get(&TypeId::of::<T>())
			.and_then(|boxed| boxed.downcast_ref::<T>())
			.cloned()
	}

	/// Check whether a value of type `T` is stored
	pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
		self.map.read().contains_key(&TypeId::of::<T>())
	}

	/// Remove and return the value of type `T`
	pub fn remove<T: Send + Sync + 'static>(&self) -> Option<T> {
		let boxed = self.map.write().remove(&TypeId::of::<T>())?;
		boxed.downcast::<T>().ok().map(|value| *value)
	}
}

impl fmt::Debug for Extensions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Extensions")
			.field("len", &self.map.read().len())
			.finish()
	}
}
