mod pipeline;
mod statistics;
