mod generator;
mod grammar;
