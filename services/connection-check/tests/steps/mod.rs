mod backend;
mod view;
