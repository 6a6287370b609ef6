pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod test_support;

/// The deployment flavour this binary is built against.
pub type DeploymentImpl = local_deployment::LocalDeployment;
