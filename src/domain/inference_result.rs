/// Arg-max output of one forward pass of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    pub label_index: usize,
    /// The checkpoint's own name for `label_index`, as read from its config.
    pub label_name: String,
    pub probability: f32,
}

impl InferenceResult {
    pub fn new(label_index: usize, label_name: impl Into<String>, probability: f32) -> Self {
        Self {
            label_index,
            label_name: label_name.into(),
            probability,
        }
    }
}
