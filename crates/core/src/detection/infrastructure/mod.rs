pub mod proportional_landmark_detector;
pub mod scripted_face_detector;
pub mod two_stage_face_detector;
