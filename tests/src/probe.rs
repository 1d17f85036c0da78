mod runner;
mod service;
