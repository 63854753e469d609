use crate::Generation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the event stream for a new submission.
    StartStream {
        generation: Generation,
        form: SubmitForm,
    },
    /// Abort a superseded submission's stream.
    CancelStream { generation: Generation },
}

/// Fields posted to the streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitForm {
    pub fitting: String,
    pub include_hull: bool,
}

impl SubmitForm {
    /// Form-encoded fields. An unchecked `include_hull` is omitted, as a browser checkbox would be.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("fitting", self.fitting.as_str())];
        if self.include_hull {
            fields.push(("include_hull", "on"));
        }
        fields
    }
}
