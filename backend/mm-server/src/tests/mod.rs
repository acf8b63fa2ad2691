mod api;
mod shutdown;
