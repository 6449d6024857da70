pub mod comparison;

mod axes_draw;
