use image::DynamicImage;

/// A recognised (or nameable) person: numeric key, optional name, optional face.
///
/// Identities may be partial. On lookups only `key` is consulted; `name` and
/// `image` on the argument are ignored and the stored values are returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub key: i64,
    pub name: Option<String>,
    pub image: Option<DynamicImage>,
}

impl Identity {
    pub fn new(key: i64, name: Option<String>, image: Option<DynamicImage>) -> Self {
        Self { key, name, image }
    }

    /// Identity carrying only a key, as used for lookups and removals.
    pub fn with_key(key: i64) -> Self {
        Self {
            key,
            name: None,
            image: None,
        }
    }

    pub fn named(key: i64, name: impl Into<String>) -> Self {
        Self {
            key,
            name: Some(name.into()),
            image: None,
        }
    }

    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn has_face(&self) -> bool {
        self.image.is_some()
    }
}

/// One `(key, name)` row of the identities table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityRow {
    pub key: i64,
    pub name: Option<String>,
}

impl IdentityRow {
    pub fn new(key: i64, name: Option<String>) -> Self {
        Self { key, name }
    }
}

impl From<&Identity> for IdentityRow {
    fn from(identity: &Identity) -> Self {
        IdentityRow::new(identity.key, identity.name.clone())
    }
}
