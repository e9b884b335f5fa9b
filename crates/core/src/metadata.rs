use crate::Document;

/// Page-level descriptive fields read from the document head.
///
/// An empty string means the field was not found. Extraction runs before
/// any stripping, since these fields usually live outside the content root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub keywords: String,
    /// Primary image URL (`og:image`), as given by the page.
    pub image: String,
}

impl Metadata {
    /// True when no field was found.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_empty())
    }

    /// `(key, value)` pairs in front-matter order.
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("title", self.title.as_str()),
            ("description", self.description.as_str()),
            ("author", self.author.as_str()),
            ("keywords", self.keywords.as_str()),
            ("image", self.image.as_str()),
        ]
    }
}

impl Document {
    /// Extract title, description, author, keywords and `og:image`.
    ///
    /// - title: first non-empty `<title>`
    /// - description / author / keywords: first non-empty `<meta name="...">`
    /// - image: first non-empty `<meta property="og:image">`
    ///
    /// Missing fields stay empty; this never fails.
    pub fn extract_metadata(&self) -> Metadata {
        let named = |name: &str| self.meta_content("name", name).unwrap_or_default();

        Metadata {
            title: self.title().unwrap_or_default(),
            description: named("description"),
            author: named("author"),
            keywords: named("keywords"),
            image: self.meta_content("property", "og:image").unwrap_or_default(),
        }
    }
}
