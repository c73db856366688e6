pub mod survey_dto;
