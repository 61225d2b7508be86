use std::borrow::Cow;

use serde_json::Value;

/// Number of sections every protocol must have.
pub const SECTION_COUNT: u32 = 13;

/// Field names inside section content that the validation engine reads.
pub mod field {
    // Section 1: protocol identification
    pub const CODIGO_PROTOCOLO: &str = "codigoProtocolo";
    pub const TITULO_COMPLETO: &str = "tituloCompleto";
    pub const VERSAO: &str = "versao";
    pub const ORIGEM_ORGANIZACAO: &str = "origemOrganizacao";
    pub const DATA_ELABORACAO: &str = "dataElaboracao";
    pub const DATA_ULTIMA_REVISAO: &str = "dataUltimaRevisao";
    pub const DATA_PROXIMA_REVISAO: &str = "dataProximaRevisao";
    pub const AMBITO_APLICACAO: &str = "ambitoAplicacao";

    // Section 4: inclusion / exclusion criteria
    pub const INCLUSAO: &str = "inclusao";
    pub const EXCLUSAO: &str = "exclusao";

    // Section 5: initial assessment
    pub const CRITERIOS_RISCO_GRAVIDADE: &str = "criteriosRiscoGravidade";
    pub const CRITERIO: &str = "criterio";
    pub const DESCRICAO: &str = "descricao";
    pub const LIMIAR_NUMERICO_OU_ESTADO: &str = "limiarNumericoOuEstado";

    // Section 7: treatment
    pub const TRATAMENTO_INSTAVEIS: &str = "tratamentoPacientesInstaveis";
    pub const MEDICAMENTOS: &str = "medicamentos";
    pub const TRATAMENTO_ESTAVEIS: &str = "tratamentoPacientesEstaveis";
    pub const MEDICAMENTOS_CONSIDERAR: &str = "medicamentosConsiderar";

    // Section 9: admission / discharge
    pub const CRITERIOS_INTERNACAO: &str = "criteriosInternacao";
    pub const CRITERIOS_ALTA: &str = "criteriosAltaHospitalarPA";
}

/// Section 1 fields that must be present and non-blank.
pub const SECTION1_REQUIRED_FIELDS: [&str; 8] = [
    field::CODIGO_PROTOCOLO,
    field::TITULO_COMPLETO,
    field::VERSAO,
    field::ORIGEM_ORGANIZACAO,
    field::DATA_ELABORACAO,
    field::DATA_ULTIMA_REVISAO,
    field::DATA_PROXIMA_REVISAO,
    field::AMBITO_APLICACAO,
];

/// Array paths inside section 7 that hold medication entries.
pub const SECTION7_MEDICATION_PATHS: [(&str, &str); 2] = [
    (field::TRATAMENTO_INSTAVEIS, field::MEDICAMENTOS),
    (field::TRATAMENTO_ESTAVEIS, field::MEDICAMENTOS_CONSIDERAR),
];

/// The JSON shape a section's content is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape {
    /// A JSON object (not an array).
    Object,
    /// A JSON array.
    Array,
    /// String, array or object are all acceptable.
    Any,
}

impl ContentShape {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ContentShape::Object => value.is_object(),
            ContentShape::Array => value.is_array(),
            ContentShape::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SectionDefinition {
    pub number: u32,
    pub title: &'static str,
    pub shape: ContentShape,
}

pub const SECTION_DEFINITIONS: [SectionDefinition; SECTION_COUNT as usize] = [
    SectionDefinition {
        number: 1,
        title: "Identificação do Protocolo",
        shape: ContentShape::Object,
    },
    SectionDefinition {
        number: 2,
        title: "Ficha Técnica e Responsabilidades",
        shape: ContentShape::Object,
    },
    SectionDefinition {
        number: 3,
        title: "Definição, Epidemiologia e Conceitos Fundamentais",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 4,
        title: "Critérios de Inclusão e Exclusão",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 5,
        title: "Avaliação Inicial e Classificação de Risco/Gravidade",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 6,
        title: "Diagnóstico",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 7,
        title: "Tratamento",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 8,
        title: "Manejo de Complicações",
        shape: ContentShape::Array,
    },
    SectionDefinition {
        number: 9,
        title: "Critérios de Internação, Alta ou Encaminhamento",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 10,
        title: "Monitoramento e Seguimento Pós-Alta",
        shape: ContentShape::Any,
    },
    SectionDefinition {
        number: 11,
        title: "Considerações Especiais",
        shape: ContentShape::Object,
    },
    SectionDefinition {
        number: 12,
        title: "Indicadores de Qualidade Assistencial",
        shape: ContentShape::Object,
    },
    SectionDefinition {
        number: 13,
        title: "Referências Bibliográficas",
        shape: ContentShape::Object,
    },
];

/// Look up the definition for a section number.
pub fn definition(number: u32) -> Option<&'static SectionDefinition> {
    SECTION_DEFINITIONS.iter().find(|d| d.number == number)
}

/// PT-BR title for a section, or `"Seção N"` for numbers outside 1..=13.
pub fn title_for(number: u32) -> Cow<'static, str> {
    match definition(number) {
        Some(def) => Cow::Borrowed(def.title),
        None => Cow::Owned(format!("Seção {number}")),
    }
}

/// Short name of a JSON value's type, for issue messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
