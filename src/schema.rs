//! Names of the external base's tables and fields.
//!
//! The production base is maintained in Russian, so the identifiers on the
//! wire are source-locale strings. This module is the only place allowed to
//! know them; everything else goes through the mapper.

pub mod tables {
    pub const USERS: &str = "Пользователи";
    pub const TEAMS: &str = "Команды";
    pub const ARTIFACTS: &str = "Артефакты";
    pub const HACKATHONS: &str = "Хакатоны";
    pub const CASES: &str = "Кейсы";
}

pub mod user {
    pub const ID: &str = "ID";
    pub const EMAIL: &str = "Почта";
    pub const FULL_NAME: &str = "Полное имя";
    pub const ROLE: &str = "Роль";
    pub const PASSWORD: &str = "Пароль";

    pub const ROLE_PARTICIPANT: &str = "Участник";
    pub const ROLE_ORGANIZER: &str = "Организатор";
    pub const ROLE_JURY: &str = "Жюри";
}

pub mod team {
    pub const ID: &str = "ID";
    pub const NAME: &str = "Название";
    pub const DESCRIPTION: &str = "Описание";
    pub const HACKATHON: &str = "Хакатон";
    pub const MEMBERS: &str = "Участники";
    pub const CASE: &str = "Кейс";
    pub const INVITE_CODE: &str = "Код приглашения";
    pub const LEADER: &str = "Лидер";
}

pub mod artifact {
    pub const TEAM: &str = "Команда ID";
    pub const NAME: &str = "Название";
    pub const FILE_URL: &str = "Ссылка";
    pub const CREATED_AT: &str = "Дата создания";
}

pub mod hackathon {
    pub const ID: &str = "ID";
    pub const TITLE: &str = "Название";
    pub const DESCRIPTION: &str = "Описание";
    pub const PUBLISH_DATE: &str = "Дата публикации";
    pub const REGISTRATION_DEADLINE: &str = "Дедлайн регистрации";
    pub const CASES_OPEN_DATE: &str = "Дата открытия кейсов";
    pub const SUBMISSION_DEADLINE: &str = "Дедлайн отправки (from Кейсы)";
    pub const STATUS: &str = "Статус";
    pub const COVER: &str = "Обложка";
    pub const LOCATION: &str = "Место проведения";

    pub const STATUS_DRAFT: &str = "Не опубликован";
    pub const STATUS_REGISTRATION_OPEN: &str = "Открыта регистрация";
    pub const STATUS_STARTED: &str = "Хакатон начался";
    pub const STATUS_FINISHED: &str = "Закончился";
}

pub mod case {
    pub const ID: &str = "ID";
    pub const NAME: &str = "Название";
    pub const DESCRIPTION: &str = "Описание";
    pub const RESULTS_UPLOAD_INFO: &str = "Результаты для загрузки";
    pub const DEADLINE: &str = "Дедлайн отправки";
    pub const HACKATHONS: &str = "Хакатон";
    pub const TEAMS: &str = "Команды";
    pub const LINKS: &str = "Links";
}
