//! Form input seam.
//!
//! The form surface reports discrete events over an mpsc channel; the
//! session applies them to the controller in arrival order.

use scanpost_core::AuxField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    FieldEdited { field: AuxField, value: String },
    SubmitPressed,
    Dismissed,
}

impl FormEvent {
    /// Field edit addressed by form key. Unknown keys yield `None`.
    pub fn edit(key: &str, value: impl Into<String>) -> Option<Self> {
        match AuxField::from_form_key(key) {
            Some(field) => Some(Self::FieldEdited {
                field,
                value: value.into(),
            }),
            None => {
                tracing::debug!(key, "Ignoring unknown form key");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_resolves_known_keys() {
        assert_eq!(
            FormEvent::edit("other", "ladder"),
            Some(FormEvent::FieldEdited {
                field: AuxField::OtherEquip,
                value: "ladder".into()
            })
        );
    }

    #[test]
    fn edit_ignores_unknown_keys() {
        assert_eq!(FormEvent::edit("email", "a@b.c"), None);
    }
}
