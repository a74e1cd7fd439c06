mod qa_chains;
mod support;
