mod http_endpoints;
mod server_workflow;
mod sse_transport;
