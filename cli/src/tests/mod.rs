mod dump;
mod find;
