//! Pastebin backends: descriptors, templates, the registry and bundled defaults.

/// Documents shipped with the crate.
pub mod bundled;
/// Backend metadata and capability set.
pub mod descriptor;
/// Name-keyed registry and directory loading.
pub mod registry;
/// `{placeholder}` request templates.
pub mod template;

pub use descriptor::{
    BackendDescriptor, DescriptorBuilder, Expiry, FormTransport, HttpMethod, Parameter,
    ResponseSource, SocketTransport, Transport,
};
pub use registry::BackendRegistry;
pub use template::{Placeholder, Template, TemplateValues};

#[cfg(test)]
mod tests;
