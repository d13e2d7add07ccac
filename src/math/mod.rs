pub mod mat4;
pub mod texcoord;
pub mod vec3;
pub mod vec4;
