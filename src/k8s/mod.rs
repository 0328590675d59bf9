//! Kubernetes integration
//!
//! All cluster access goes through the `kubectl` binary:
//! - building `kubectl` invocations
//! - reading the ingress address of the demo application

mod ingress;
mod kubectl;

pub use ingress::{parse_ingress_ip, IngressLookup};
pub use kubectl::Kubectl;
