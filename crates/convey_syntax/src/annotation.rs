use rustc_hash::FxHashMap;

use crate::ElementId;

/// Identifies the kind of an [`Annotation`], used to query a tree for annotated elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    ConversionError,
    Selection,
}

/// Out-of-band metadata attached to an element of a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Something went wrong converting the annotated element; the converted text is still
    /// present but it might not be what the user expects.
    ConversionError(String),

    /// The annotated element corresponds to the text the user selected. When
    /// `wraps_selection` is set the element is a wrapper that was introduced around the
    /// selected element during conversion.
    Selection { wraps_selection: bool },
}

impl Annotation {
    pub fn conversion_error(message: impl Into<String>) -> Self {
        Annotation::ConversionError(message.into())
    }

    pub fn selection() -> Self {
        Annotation::Selection {
            wraps_selection: false,
        }
    }

    pub fn selection_wrapper() -> Self {
        Annotation::Selection {
            wraps_selection: true,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::ConversionError(_) => AnnotationKind::ConversionError,
            Annotation::Selection { .. } => AnnotationKind::Selection,
        }
    }
}

/// Side table that maps elements of a tree to their annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AnnotationTable {
    entries: FxHashMap<ElementId, Vec<Annotation>>,
}

impl AnnotationTable {
    pub(crate) fn get(&self, id: ElementId) -> &[Annotation] {
        self.entries.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Adds an annotation to an element. Adding an identical annotation twice is a no-op.
    pub(crate) fn add(&mut self, id: ElementId, annotation: Annotation) {
        let annotations = self.entries.entry(id).or_default();
        if !annotations.contains(&annotation) {
            annotations.push(annotation);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
