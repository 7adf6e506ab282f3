//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for renik. A backend owns
//! the native [`Surface`](renik_windowing::Surface) it renders into: the OpenGL context is made
//! current, its entry points loaded and its default state captured when
//! [`Graphic::init`](renik::Graphic::init) is called.

pub mod gl33;

pub use gl33::GL33;
