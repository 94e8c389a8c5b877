pub mod op_helper;
pub mod image_capture_op;
pub mod rename_op;
pub mod calib_command_op;
pub mod remote_script_op;
