use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A navigable to-many relationship that may not have been fetched yet.
///
/// `NotLoaded` means nobody asked storage for the related records; it is never
/// a stand-in for "no records". An empty result from storage is `Loaded(vec![])`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Related<T> {
    #[default]
    NotLoaded,
    Loaded(Vec<T>),
}

impl<T> Related<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Related::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&[T]> {
        match self {
            Related::Loaded(items) => Some(items),
            Related::NotLoaded => None,
        }
    }

    pub fn len_if_loaded(&self) -> Option<usize> {
        self.as_loaded().map(<[T]>::len)
    }
}

// Serialized as `null` until loaded so JSON consumers see the same distinction.
impl<T: Serialize> Serialize for Related<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_loaded().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Related<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Vec<T>>::deserialize(deserializer)? {
            Some(items) => Related::Loaded(items),
            None => Related::NotLoaded,
        })
    }
}
