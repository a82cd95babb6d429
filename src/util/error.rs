//! Domain errors raised by the associative containers.
use std::error::Error;
use std::fmt::{self, Display, Formatter};

use derive_more::{Display, Error, From, IsVariant, TryInto};

use crate::alloc::AllocError;

/// The error returned by checked lookups such as `at`, when the map holds no entry for the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl Display for KeyNotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Key not found in associative container!")
    }
}

impl Error for KeyNotFound {}

/// Any recoverable error raised by a container, for callers that want to propagate both lookup
/// and allocation failures with `?`.
///
/// ```
/// # use allocated_std::collections::ContainerError;
/// # use allocated_std::collections::hash::HashMap;
/// fn copy_forward(map: &mut HashMap<u32, u32>, key: u32) -> Result<u32, ContainerError> {
///     let value = *map.at(&key)?;
///     map.try_insert(key + 1, value)?;
///     Ok(value)
/// }
///
/// let mut map = HashMap::from([(1, 10)]);
/// assert_eq!(copy_forward(&mut map, 1), Ok(10));
/// assert_eq!(map[&2], 10);
/// assert!(copy_forward(&mut map, 7).is_err_and(|error| error.is_key_not_found()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From, TryInto, IsVariant)]
pub enum ContainerError {
    /// A checked lookup found no entry for the key.
    KeyNotFound(KeyNotFound),
    /// The container's allocator couldn't provide memory.
    AllocError(AllocError),
}
