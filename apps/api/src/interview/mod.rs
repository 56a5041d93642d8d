// Voice interview simulator.
// Stateless per call: the client threads session counters through every request.
// All model calls go through llm_client::ModelGateway.

pub mod analyzer;
pub mod controller;
pub mod handlers;
pub mod language;
pub mod models;
pub mod normalizer;
pub mod prompt_generator;
pub mod prompts;
