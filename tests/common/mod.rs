pub mod synthetic_shelf;
