pub mod mesh_control_plane;
