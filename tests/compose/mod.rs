mod cache;
mod conditions;
mod dialects;
mod handlers;
mod lookups;
mod relations;
