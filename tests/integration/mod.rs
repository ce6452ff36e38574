//! Integration tests for the hierarchical record store

mod crud_tree;
mod optimistic_requests;
