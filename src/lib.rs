pub mod assets;

pub mod arch;

pub mod assembler;

pub mod cli;
